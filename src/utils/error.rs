//! 错误类型
//!
//! 所有错误都只影响单个 provider / 单个站点所在的那一行，不会中断整轮检测。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} HTTP {status}")]
    Http { provider: String, status: u16 },

    #[error("{provider} 请求失败: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} 返回的 JSON 无法解析: {source}")]
    Parse {
        provider: String,
        #[source]
        source: serde_json::Error,
    },
}

// 探测请求明确失败（超时不算错误，单独分类）
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("网络错误: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    #[error("无效的探测地址 {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
