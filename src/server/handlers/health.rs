pub async fn check() -> &'static str {
    "Healthy"
}
