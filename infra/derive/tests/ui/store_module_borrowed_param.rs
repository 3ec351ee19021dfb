use storemod_derive::store_module;

pub struct Session;

#[store_module(state = ())]
impl Session {
    #[mutation]
    pub fn rename(&self, name: &str) {}
}

fn main() {
    let _ = Session;
}
