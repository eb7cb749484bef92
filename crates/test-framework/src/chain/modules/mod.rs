/*!
   Thin per-module CLI wrappers, all expressed over the two node
   capabilities `exec_tx` and `exec_query`.
*/

pub mod authz;
pub mod bank;
pub mod cosmwasm;
pub mod gov;
pub mod staking;
