fn main() -> Result<(), Box<dyn std::error::Error>> {
    chatmask::cli::main()
}
