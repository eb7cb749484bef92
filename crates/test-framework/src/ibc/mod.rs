/*!
   IBC-facing records: packets, channels, connections, denom traces.
*/

pub mod channel;
pub mod denom;
pub mod packet;
