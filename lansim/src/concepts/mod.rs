pub mod device;
pub mod history;
pub mod interface;
pub mod neighbour;
pub mod packet;
pub mod policy;
