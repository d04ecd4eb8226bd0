fn main() {
    swimcalc_lib::run()
}
