mod helpers;
mod lifecycle;
mod session;
