fn main() -> anyhow::Result<()> {
    newt::run()
}
