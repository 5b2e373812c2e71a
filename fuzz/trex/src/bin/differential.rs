use fuzz_trex::Input;

fn main() {
    afl::fuzz!(|data: Input| data.run());
}
