mod lifecycle;
mod session;
mod wire;
