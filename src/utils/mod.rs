pub mod args; // 命令行参数
pub mod common; // 公共的小函数：版本判断、位置拼接、时长格式化
pub mod error; // provider / 探测的错误类型
pub mod files; // 导出 CSV
pub mod filter; // 国内 / 国际过滤开关
pub mod logger; // 日志初始化
pub mod models; // 数据结构
pub mod network; // IP 地理位置 provider
pub mod probe; // 连通性测试
pub mod render; // 终端输出
pub mod resolve; // 字段别名表
pub mod session; // 两条流水线的状态与调度
