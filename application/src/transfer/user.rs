pub struct CreateUserDto {
    pub name: String,
}
