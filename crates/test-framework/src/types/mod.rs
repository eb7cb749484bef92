/*!
   Core data types shared across the framework.
*/

pub mod config;
pub mod tx;
pub mod wallet;
