// Relational rules shared by both stores. migrations/ declares the same
// constraint names so Postgres errors map onto these constants.

pub const USERS_USERNAME_KEY: &str = "users_username_key";
pub const PROFILES_OWNER_KEY: &str = "profiles_owner_id_key";
pub const LIKES_OWNER_POST_KEY: &str = "likes_owner_id_post_id_key";
pub const FOLLOWERS_OWNER_FOLLOWED_KEY: &str = "followers_owner_id_followed_id_key";
pub const CATEGORIES_NAME_KEY: &str = "categories_name_key";

pub const COMMENTS_POST_FKEY: &str = "comments_post_id_fkey";
pub const LIKES_POST_FKEY: &str = "likes_post_id_fkey";
pub const FOLLOWERS_FOLLOWED_FKEY: &str = "followers_followed_id_fkey";
pub const PRODUCTS_CATEGORY_FKEY: &str = "products_category_id_fkey";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
}

#[derive(Debug)]
pub struct ForeignKey {
    pub name: &'static str,
    pub table: &'static str,
    pub column: &'static str,
    pub references: &'static str,
    pub on_delete: OnDelete,
}

#[derive(Debug)]
pub struct UniqueKey {
    pub name: &'static str,
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

pub const TABLES: &[&str] = &["users", "profiles", "posts", "comments", "likes", "followers", "categories", "products"];

pub const FOREIGN_KEYS: &[ForeignKey] = &[
    ForeignKey { name: "profiles_owner_id_fkey", table: "profiles", column: "owner_id", references: "users", on_delete: OnDelete::Cascade },
    ForeignKey { name: "posts_owner_id_fkey", table: "posts", column: "owner_id", references: "users", on_delete: OnDelete::Cascade },
    ForeignKey { name: "comments_owner_id_fkey", table: "comments", column: "owner_id", references: "users", on_delete: OnDelete::Cascade },
    ForeignKey { name: COMMENTS_POST_FKEY, table: "comments", column: "post_id", references: "posts", on_delete: OnDelete::Cascade },
    ForeignKey { name: "likes_owner_id_fkey", table: "likes", column: "owner_id", references: "users", on_delete: OnDelete::Cascade },
    ForeignKey { name: LIKES_POST_FKEY, table: "likes", column: "post_id", references: "posts", on_delete: OnDelete::Cascade },
    ForeignKey { name: "followers_owner_id_fkey", table: "followers", column: "owner_id", references: "users", on_delete: OnDelete::Cascade },
    ForeignKey { name: FOLLOWERS_FOLLOWED_FKEY, table: "followers", column: "followed_id", references: "users", on_delete: OnDelete::Cascade },
    ForeignKey { name: "products_owner_id_fkey", table: "products", column: "owner_id", references: "users", on_delete: OnDelete::Cascade },
    ForeignKey { name: PRODUCTS_CATEGORY_FKEY, table: "products", column: "category_id", references: "categories", on_delete: OnDelete::SetNull },
];

pub const UNIQUE_KEYS: &[UniqueKey] = &[
    UniqueKey { name: USERS_USERNAME_KEY, table: "users", columns: &["username"] },
    UniqueKey { name: PROFILES_OWNER_KEY, table: "profiles", columns: &["owner_id"] },
    UniqueKey { name: LIKES_OWNER_POST_KEY, table: "likes", columns: &["owner_id", "post_id"] },
    UniqueKey { name: FOLLOWERS_OWNER_FOLLOWED_KEY, table: "followers", columns: &["owner_id", "followed_id"] },
    UniqueKey { name: CATEGORIES_NAME_KEY, table: "categories", columns: &["name"] },
];
