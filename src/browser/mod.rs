mod cdp_host;
mod discovery;
mod launcher;
mod page;
mod session;

pub use cdp_host::{CdpHost, DomSink};
pub use discovery::{discover_all_browsers, discover_browser, BrowserInfo, BrowserType};
pub use launcher::BrowserLauncher;
pub use page::CdpPage;
pub use session::{fetch_browser_ws_url, parse_cdp_endpoint, BrowserSession, PageInfo};
