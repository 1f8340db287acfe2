//! Integration tests for the session coordinator and render loop

mod support;
mod concurrency;
