use bookshelf_mcp::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bookshelf_mcp::logging::init();
    let config = Config::from_env();
    bookshelf_mcp::interface::mcp::run(config).await
}
