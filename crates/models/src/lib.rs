//! sea-orm entities for providers (`convenio`), their address (`endereco`)
//! and the specialties they offer (`especialidade`), plus field validators.

pub mod errors;
pub mod db;
pub mod convenio;
pub mod endereco;
pub mod especialidade;
