mod test_cover;
mod test_data;
mod test_stage;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
