//! 多来源查询本机公网 IP 与地理位置，附带国内外站点连通性测试。

pub mod utils;

pub use utils::error::{ ProbeError, ProviderError };
pub use utils::filter::ScopeFilter;
pub use utils::models::{
    ConnectivityOutcome,
    ConnectivitySite,
    GeoResult,
    IpVersion,
    MainSummary,
    ProbeStatus,
    RowStatus,
    Scope,
};
pub use utils::network::{ build_client, Adapter, ProviderSpec };
pub use utils::probe::build_probe_client;
pub use utils::session::{ GeoSnapshot, ProbeSnapshot, RefreshScope, Report, Session };
