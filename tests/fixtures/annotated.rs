// User controller declaring its routes with attributes
use ninja::{Context, Result, Session};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[api(name = "User")]
pub struct User {
    #[api]
    pub id: i64,
    #[api]
    #[required]
    #[length(min = 3, max = 32)]
    pub username: String,
    #[api]
    pub email: String,
    #[api("User Status")]
    #[values(allowed = ["1-registered", "2-active", "3-closed"])]
    pub user_status: i32,
    #[api]
    pub friends: Vec<User>,
    #[api]
    #[hidden]
    pub password: String,
}

#[path("/user")]
pub struct UserController;

#[api(name = "user", value = "Operations about user")]
#[json]
impl UserController {
    #[api("Get user by user name")]
    #[returns(User)]
    #[response_code(code = 404, message = "User not found")]
    #[get("/:username")]
    pub fn get_user_by_name(
        &self,
        #[path_param("username")]
        #[api("The name that needs to be fetched. Use user1 for testing.")]
        username: String,
    ) -> Result {
        Result::json(User::find(&username))
    }

    #[api("Logs out current logged in user session")]
    #[get("/logout")]
    pub fn logout_user(&self, session: Session) -> Result {
        session.clear();
        Result::ok(())
    }

    #[api("Logs user into the system")]
    #[get("/login")]
    #[order(2)]
    #[produces("text/plain")]
    pub fn login_user(
        &self,
        #[param("username")]
        #[api("The user name for login")]
        #[required]
        username: String,
        #[param("password")]
        #[api("The password for login in clear text")]
        #[required]
        password: String,
        #[headers("X-Forwarded-For")] forwarded: Vec<String>,
    ) -> Result {
        Result::text(User::login(&username, &password, &forwarded))
    }

    #[api("Create user")]
    #[notes("This can only be done by the logged in user.")]
    #[post("/")]
    #[order(1)]
    pub fn create_user(&self, ctx: Context, #[api("Created user object")] user: User) -> Result {
        Result::json(user.save(&ctx))
    }

    #[get("/internal/stats")]
    pub fn stats(&self) -> Result {
        Result::ok(())
    }
}
