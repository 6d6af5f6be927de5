pub mod direct;
pub mod proxy;
pub mod types;

pub use direct::{DirectConfig, DirectExecutor};
pub use proxy::{ProxyConfig, ProxyExecutor};
pub use types::{AnalysisExecutor, ProxyAnalyzeRequest, ProxyStatusResponse, RemoteStatus};
