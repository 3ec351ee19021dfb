use storemod_derive::store_module;

pub struct Counter;

#[store_module(state = ())]
impl Counter {
    #[mutation]
    pub fn a(&self) {}

    #[mutation(name = "a")]
    pub fn b(&self) {}
}

fn main() {
    let _ = Counter;
}
