fn main() -> std::process::ExitCode {
    filecutter::cli::main()
}
