use app::{bootstrap, config, routes};
use lattice::Application;

#[tokio::main]
async fn main() {
    Application::new()
        .config(config::register_all)
        .module("app::business")
        .module("app::promotions")
        .bootstrap(bootstrap::register)
        .routes(routes::register)
        .run()
        .await;
}
