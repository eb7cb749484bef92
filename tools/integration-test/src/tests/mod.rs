pub mod export;
pub mod forward;
pub mod governance;
pub mod ics;
pub mod transfer;
