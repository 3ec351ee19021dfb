use storemod_derive::store_module;

pub struct Counter;

#[store_module(state = ())]
impl Counter {
    #[mutation]
    pub fn bump(&mut self) {}

    #[getter]
    pub fn pick<T>(&self) -> u32 {
        0
    }
}

fn main() {
    let _ = Counter;
}
