fn main() {
  ringscan::main();
}
