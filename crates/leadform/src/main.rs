fn main() -> anyhow::Result<()> {
    leadform::cli::main()
}
