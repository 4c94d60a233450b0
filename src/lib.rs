#![allow(non_snake_case)]

pub mod clients;
pub mod error;
pub mod models;
pub mod service;
