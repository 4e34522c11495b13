//! Inbound adapters translate external stimuli (the command line) into
//! application calls.

pub mod cli;
