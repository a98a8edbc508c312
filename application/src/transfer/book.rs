pub struct CreateBookDto {
    pub title: String,
}
