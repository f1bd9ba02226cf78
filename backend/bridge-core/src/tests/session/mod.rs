mod actor;
mod connection_state;
mod queue;
mod reconnect;
mod registry;
mod transport;
