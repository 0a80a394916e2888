use addlogging::addlogging;

#[addlogging]
fn add(x: i32, y: i32) -> i32 {
    x + y
}

#[addlogging]
pub fn greet() {
    println!("hello");
}

fn main() {
    assert_eq!(add(2, 3), Some(5));
    assert_eq!(greet(), Some(()));
}
