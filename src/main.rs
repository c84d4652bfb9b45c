fn main() {
    cyberguard_lib::run()
}
