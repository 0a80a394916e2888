use std::io;

use addlogging::addlogging;

type AppResult<T> = Result<T, String>;

#[addlogging]
fn io_alias(ok: bool) -> io::Result<u32> {
    if ok {
        Ok(1)
    } else {
        Err(io::Error::other("nope"))
    }
}

#[addlogging]
fn boxed(ok: bool) -> Result<&'static str, Box<dyn std::error::Error + Send + Sync>> {
    if !ok {
        return Err("refused".into());
    }
    Ok("fine")
}

#[addlogging]
fn option_body(values: Vec<i32>) -> Option<i32> {
    let first = values.first()?;
    Some(first * 2)
}

fn main() {
    assert_eq!(io_alias(true), Some(1));
    assert_eq!(io_alias(false), None);
    assert_eq!(boxed(true), Some("fine"));
    assert_eq!(boxed(false), None);
    assert_eq!(option_body(vec![]), Some(None));
    assert_eq!(option_body(vec![4]), Some(Some(8)));

    // aliases not spelled `Result` are plain values
    #[addlogging]
    fn app(ok: bool) -> AppResult<u8> {
        if ok { Ok(1) } else { Err("bad".into()) }
    }
    assert_eq!(app(false), Some(Err("bad".to_string())));
}
