mod args;
mod binary;
mod launch_spec;
