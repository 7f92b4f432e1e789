fn main() {
    if tapguard_lib::run().is_err() {
        std::process::exit(1);
    }
}
