use std::time::Duration;

use addlogging::setup::{self, LogConfig, SetupError};
use addlogging::{AddLogging, addlogging, logged};

/// Adds one; the plainest thing there is to wrap.
#[addlogging]
fn add_one(x: i32) -> i32 {
    x + 1
}

/// Panics when `b` is zero. The wrapper reports it and returns `None`.
#[addlogging]
fn divide(a: i32, b: i32) -> i32 {
    a / b
}

#[addlogging]
fn parse_port(raw: &str) -> Result<u16, std::num::ParseIntError> {
    raw.parse()
}

#[addlogging]
async fn greet_later(name: String, delay_ms: u64) -> String {
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    format!("hello, {name}")
}

fn shout(message: &str) -> String {
    message.to_uppercase()
}

#[tokio::main]
async fn main() -> Result<(), SetupError> {
    setup::init(&LogConfig::from_env())?;

    println!("add_one(41) = {:?}", add_one(41));
    println!("divide(1, 0) = {:?}", divide(1, 0));
    println!("parse_port(\"8080\") = {:?}", parse_port("8080"));
    println!("parse_port(\"http\") = {:?}", parse_port("http"));

    let (first, second) = tokio::join!(
        greet_later("ferris".to_owned(), 20),
        greet_later("corro".to_owned(), 10),
    );
    println!("greetings = {first:?}, {second:?}");

    let loud = logged!(shout);
    println!("shout = {:?}", loud.call(("quiet",)));

    let config = AddLogging::new();
    let square = config.apply("square", |x: u64| x * x);
    let twice = config.apply("square_twice", square);
    println!("square_twice(3) = {:?}", twice.call((3,)));

    Ok(())
}
