#![allow(dead_code)]

pub mod td_server;
