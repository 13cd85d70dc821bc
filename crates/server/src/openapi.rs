use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct EnderecoInputDoc {
    pub id: Option<Uuid>,
    pub convenio_id: Option<Uuid>,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: String,
    /// 8 digits
    pub postal_code: String,
    pub city: String,
    /// 2-letter code
    pub state: String,
}

#[derive(ToSchema)]
pub struct ConvenioInputDoc {
    /// Required on update; must match the path id.
    pub id: Option<Uuid>,
    pub name: String,
    /// 11 or 14 digits
    pub document: String,
    pub email: String,
    pub phone: Option<String>,
    pub active: bool,
    pub endereco: Option<EnderecoInputDoc>,
}

#[derive(ToSchema)]
pub struct EspecialidadeInputDoc {
    /// Required on update; must match the path id.
    pub id: Option<Uuid>,
    pub convenio_id: Uuid,
    pub name: String,
    pub description: String,
    pub value: f64,
    pub active: bool,
    /// Base name for the stored file. On update, empty keeps the stored image.
    pub image: Option<String>,
    /// Base64 image bytes. Required on create.
    pub image_upload: Option<String>,
}

#[derive(ToSchema)]
pub struct EspecialidadeUploadDoc {
    /// JSON with the same fields as the inline create, minus `image_upload`.
    pub especialidade: String,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::convenios::list,
        crate::routes::convenios::get,
        crate::routes::convenios::create,
        crate::routes::convenios::update,
        crate::routes::convenios::delete,
        crate::routes::convenios::list_especialidades,
        crate::routes::convenios::get_endereco,
        crate::routes::convenios::update_endereco,
        crate::routes::especialidades::list,
        crate::routes::especialidades::get,
        crate::routes::especialidades::create,
        crate::routes::especialidades::create_upload,
        crate::routes::especialidades::update,
        crate::routes::especialidades::delete,
        crate::routes::especialidades::sweep_images,
    ),
    components(
        schemas(
            HealthResponse,
            EnderecoInputDoc,
            ConvenioInputDoc,
            EspecialidadeInputDoc,
            EspecialidadeUploadDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "convenios"),
        (name = "especialidades"),
        (name = "maintenance")
    )
)]
pub struct ApiDoc;
