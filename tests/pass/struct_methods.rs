use addlogging::addlogging;

struct Calculator {
    base: f64,
}

impl Calculator {
    #[addlogging]
    fn new(base: f64) -> Self {
        Calculator { base }
    }

    #[addlogging]
    pub fn compute(&self, factor: f64) -> f64 {
        self.base * factor
    }

    #[addlogging]
    pub fn rebase(&mut self, base: f64) {
        self.base = base;
    }

    #[addlogging]
    pub fn into_base(self) -> f64 {
        self.base
    }
}

impl std::fmt::Debug for Calculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Calculator({})", self.base)
    }
}

fn main() {
    let Some(mut calc) = Calculator::new(2.0) else {
        panic!("constructor failed");
    };
    assert_eq!(calc.compute(3.0), Some(6.0));
    assert_eq!(calc.rebase(4.0), Some(()));
    assert_eq!(calc.into_base(), Some(4.0));
}
