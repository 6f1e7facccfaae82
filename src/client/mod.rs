mod account;
mod refresh;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;

pub use request::{FormData, FormPart, FormValue, RequestBody, RequestOptions};
pub use response::ApiResponse;
pub use session::{Session, SessionBuilder};
pub use transport::{PreparedBody, PreparedRequest, ReqwestTransport, Transport};
