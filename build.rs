fn main() {
    // ESP-IDF link arguments are only needed for the firmware build; host
    // builds (tests, property checks) have nothing to emit.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
