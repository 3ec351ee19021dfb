use storemod_derive::mutation;

pub struct Counter;

impl Counter {
    #[mutation]
    pub fn add(&self) {}
}

fn main() {
    Counter.add();
}
