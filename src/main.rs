fn main() -> anyhow::Result<()> {
    loc_codegen::run()
}
