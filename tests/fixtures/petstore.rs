// Petstore application using an explicit router table
use chrono::{DateTime, Utc};
use ninja::{Context, Result, Router};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

mod user;

#[api_info(
    title = "Swagger Sample App",
    description = "This is a sample server Petstore server.",
    terms_of_service = "http://swagger.io/terms/",
    contact = "apiteam@swagger.io",
    license = "Apache 2.0",
    license_url = "http://www.apache.org/licenses/LICENSE-2.0.html"
)]
#[version("1.0.0")]
pub struct Routes;

impl Routes {
    pub fn init(router: &mut Router) {
        router.get().route("/pet/:petId").with(PetController::get_pet_by_id);
        router.get().route("/pet/findByStatus").with(PetController::find_pets_by_status);
        router.get().route("/pet/findByTags").with(PetController::find_pets_by_tags);
        router.post().route("/pet").with(PetController::add_pet);
        router.post().route("/pet/uploadImage").with(PetController::upload_file);
        router.delete().route("/pet/:petId").with(PetController::delete_pet);
        router.get().route("/pet/:petId/export").with(PetController::export);

        router.get().route("/store/order/:orderId").with(StoreController::get_order_by_id);
        router.post().route("/store/order").with(StoreController::place_order);

        router.get().route("/health").with(health_check);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[api(name = "Category")]
pub struct Category {
    #[api]
    pub id: i64,
    #[api]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[api(name = "Tag")]
pub struct Tag {
    #[api]
    pub id: i64,
    #[api]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PetStatus {
    Available,
    Pending,
    Sold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[api(name = "Pet")]
pub struct Pet {
    #[api("unique identifier for the pet")]
    #[required]
    pub id: i64,
    #[api]
    pub category: Option<Category>,
    #[api]
    #[required]
    pub name: String,
    #[api]
    pub photo_urls: Vec<String>,
    #[api]
    pub tags: Vec<Tag>,
    #[api("pet status in the store")]
    pub status: PetStatus,
    #[api]
    pub parent: Option<Box<Pet>>,
    pub internal_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[api(name = "Order")]
pub struct Order {
    #[api]
    pub id: i64,
    #[api]
    pub pet_id: i64,
    #[api]
    pub quantity: i32,
    #[api]
    pub ship_date: DateTime<Utc>,
    #[api("Order Status")]
    #[values(allowed = ["placed", "approved", "delivered"])]
    pub status: String,
    #[api]
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize)]
#[api(name = "ApiError")]
pub struct ApiError {
    #[api]
    pub code: i32,
    #[api]
    pub message: String,
}

#[path("/pet")]
pub struct PetController;

#[api(name = "pet", value = "Operations about pets")]
#[json]
#[xml]
impl PetController {
    #[api("Find pet by ID")]
    #[notes("Returns a pet when ID < 10. ID > 10 or nonintegers will simulate API error conditions")]
    #[returns(Pet)]
    #[response_code(code = 400, message = "Invalid ID supplied")]
    #[response_code(code = 404, message = "Pet not found", returns = ApiError)]
    pub fn get_pet_by_id(
        &self,
        #[path_param("petId")]
        #[api("ID of pet that needs to be fetched")]
        #[min(1)]
        #[max(5)]
        pet_id: i64,
    ) -> Result {
        Result::json(Pet::find(pet_id))
    }

    #[api("Finds Pets by status")]
    #[notes("Multiple status values can be provided with comma separated strings")]
    #[returns(Vec<Pet>)]
    pub fn find_pets_by_status(
        &self,
        #[params("status")]
        #[api("Status values that need to be considered for filter")]
        #[values(default_value = "available", allowed = ["available", "pending", "sold"])]
        status: Vec<String>,
    ) -> Result {
        Result::json(Pet::find_by_status(&status))
    }

    #[api("Finds Pets by tags")]
    #[deprecated]
    pub fn find_pets_by_tags(&self, #[params("tags")] tags: HashSet<String>) -> Result {
        Result::json(Pet::find_by_tags(&tags))
    }

    #[api("Add a new pet to the store")]
    #[consumes("application/json")]
    #[filter_with(BasicAuthFilter)]
    #[response_code(code = 405, message = "Invalid input")]
    pub fn add_pet(
        &self,
        ctx: Context,
        #[api("Pet object that needs to be added to the store")] pet: Pet,
    ) -> Result {
        Result::json(pet.save(&ctx))
    }

    #[api("uploads an image")]
    #[form(
        field(name = "additionalMetadata", description = "Additional data to pass to server"),
        field(name = "file", type_of = "file", description = "file to upload")
    )]
    pub fn upload_file(&self, ctx: Context) -> Result {
        Result::ok(ctx.upload())
    }

    #[api("Deletes a pet")]
    #[hidden]
    pub fn delete_pet(
        &self,
        #[path_param("petId")] pet_id: i64,
        #[header("api_key")] api_key: String,
    ) -> Result {
        Result::ok(Pet::delete(pet_id, &api_key))
    }

    pub fn export(&self, #[path_param("petId")] pet_id: i64) -> Result {
        Result::text(Pet::find(pet_id).to_string())
    }
}

#[api(name = "store", value = "Operations about store")]
#[json]
pub trait StoreApi {
    #[api("Find purchase order by ID")]
    #[notes("For valid response try integer IDs with value <= 5")]
    #[returns(Order)]
    #[response_code(code = 404, message = "Order not found")]
    fn get_order_by_id(
        &self,
        #[path_param("orderId")]
        #[api("ID of the order that needs to be fetched")]
        order_id: String,
    ) -> Result;

    #[api("Place an order for a pet")]
    #[returns(Order)]
    fn place_order(&self, #[api("order placed for purchasing the pet")] order: Order) -> Result;
}

#[path("/store")]
#[filter_with(BasicAuthFilter, LoggingFilter)]
pub struct StoreController;

impl StoreApi for StoreController {
    fn get_order_by_id(&self, order_id: String) -> Result {
        Result::json(Order::find(&order_id))
    }

    #[deprecated]
    fn place_order(&self, order: Order) -> Result {
        Result::json(order.place())
    }
}

pub fn health_check() -> Result {
    Result::ok("OK")
}

fn main() {
    let mut router = Router::new();
    Routes::init(&mut router);
    ninja::serve(router);
}
