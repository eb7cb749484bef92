/*!
   Chains and their nodes.
*/

pub mod cosmos;
pub mod genesis;
pub mod ics;
pub mod modules;
pub mod node;
pub mod rpc;
