// Route handlers
//
// health    - banner and database connectivity (/, /api/health, /api/test)
// registers - trade and training registration CRUD plus alert workflow
pub mod health;
pub mod registers;
