fn main() -> anyhow::Result<()> {
    shiftboard_lib::run()
}
