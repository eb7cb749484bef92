/*!
   Utilities shared across the framework.
*/

pub mod json;
pub mod moniker;
pub mod poll;
pub mod random;
pub mod retry;
