fn main() {
    jobfit_client_lib::run()
}
